//! Services module
//!
//! Business logic of the booking engine. Pricing, availability and the
//! lifecycle are pure; the service structs wire them to the stores.

pub mod approval_service;
pub mod availability;
pub mod booking_service;
pub mod clock;
pub mod lifecycle;
pub mod payment_proof;
pub mod pricing;
pub mod settlement;

pub use approval_service::{ApprovalWorkflow, Decision, PendingReview};
pub use availability::{Availability, AvailabilityChecker};
pub use booking_service::BookingService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use payment_proof::{LocalProofStorage, ProofStorage, StorageError};
pub use pricing::{LineItem, PriceQuote, PricingCalculator};
pub use settlement::Settlement;

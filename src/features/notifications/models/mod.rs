mod outbound_email;

pub use outbound_email::{DeliveryState, EmailFilter, NewOutboundEmail, OutboundEmail};

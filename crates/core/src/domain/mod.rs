pub mod agent;
pub mod lead;
pub mod organization;
pub mod quote;
pub mod telephony;

pub mod contracts;
pub mod invoicing;
pub mod mediation;

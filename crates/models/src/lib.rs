pub mod errors;
pub mod db;
pub mod validate;

pub mod customer;
pub mod mechanic;
pub mod priority;
pub mod ticket_status;
pub mod category;
pub mod part_description;
pub mod serialized_part;
pub mod service_ticket;
pub mod service_mechanic;

#[cfg(test)]
mod tests;

pub mod customer;
pub mod material;
pub mod rental;
pub mod rental_item;
pub mod user;

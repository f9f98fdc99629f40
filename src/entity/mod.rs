pub mod cart_products;
pub mod carts;
pub mod categories;
pub mod customers;
pub mod notebooks;
pub mod orders;
pub mod smartphones;
pub mod users;

pub use cart_products::Entity as CartProducts;
pub use carts::Entity as Carts;
pub use categories::Entity as Categories;
pub use customers::Entity as Customers;
pub use notebooks::Entity as Notebooks;
pub use orders::Entity as Orders;
pub use smartphones::Entity as Smartphones;
pub use users::Entity as Users;

pub mod audit_logs;
pub mod order_items;
pub mod orders;
pub mod products;
pub mod support_tickets;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use order_items::Entity as OrderItems;
pub use orders::Entity as Orders;
pub use products::Entity as Products;
pub use support_tickets::Entity as SupportTickets;
pub use users::Entity as Users;

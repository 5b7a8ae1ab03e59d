pub mod contacts;
pub mod document;
pub mod export;
pub mod format;
pub mod invoice_number;
pub mod invoices;
pub mod payments;
pub mod totals;
pub mod users;

pub use contacts::ContactService;
pub use invoices::InvoiceService;
pub use payments::PaymentService;
pub use users::UserService;

pub mod company;
pub mod contact;
pub mod invoice;
pub mod payment;
pub mod query;
pub mod user;

pub use company::Company;
pub use contact::{Contact, ContactSearchColumn, ContactType, NewContact};
pub use invoice::{
    Invoice, InvoiceDetail, InvoiceDirection, InvoiceItem, InvoiceListItem, InvoiceSearchColumn,
    InvoiceStatus, NewInvoice, StatusUpdate,
};
pub use payment::{NewPayment, Payment, PaymentStatus};
pub use query::{FilterOption, Paginated, Pagination, SortOrder};
pub use user::User;

//! Resource services: SQL for products, users, quotations and quotation lines.

mod details;
mod paging;
mod products;
mod quotations;
mod users;
mod validation;
pub use details::{NewDetail, QuotationDetailService};
pub use paging::{parse_limit, PageRequest};
pub use products::{NewProduct, ProductChanges, ProductQuery, ProductService};
pub use quotations::{NewQuotation, QuotationFilters, QuotationService, StatusChange};
pub use users::{LoginResponse, NewUser, UserChanges, UserQuery, UserService};
pub use validation::{body_object, is_truthy, optional_text, RequestValidator};

// Business logic layer. Handlers authorize and shape responses; everything in
// between lives here.

pub mod account;
pub mod activity;
pub mod blog;
pub mod curriculum;
pub mod email;
pub mod jwt;
pub mod product;
pub mod service_catalog;

pub use account::AccountService;
pub use activity::ActivityService;
pub use blog::BlogService;
pub use curriculum::{CurriculumService, ModulesUpdate};
pub use email::{EmailError, EmailService};
pub use jwt::{JwtError, JwtService};
pub use product::ProductService;
pub use service_catalog::{BulkOutcome, ServiceCatalog};

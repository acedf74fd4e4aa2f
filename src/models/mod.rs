pub mod activity;
pub mod auth;
pub mod blog;
pub mod contact;
pub mod content;
pub mod curriculum;
pub mod pagination;
pub mod product;
pub mod service;
pub mod user;

// Re-export common types
pub use activity::{Activity, ActivityAction};
pub use auth::{AccessTokenClaims, LoginRequest, LoginResponse, RegisterRequest};
pub use blog::{Author, BlogPost, CreatePostRequest, PostListParams, PostStatus, UpdatePostRequest};
pub use contact::ContactRequest;
pub use content::{Faq, Feature, Package, Testimonial};
pub use curriculum::{Lesson, LessonInput, Module, ModuleInput, Resource, ResourceInput};
pub use pagination::{Listing, PageRequest, Pagination};
pub use product::{
    CreateProductRequest, Difficulty, Instructor, InstructorInput, Product, ProductListParams,
    ProductStatus, ProductType, UpdateProductRequest,
};
pub use service::{
    BulkServiceRequest, BulkUpdateData, CreateServiceRequest, Service, ServiceListParams,
    ServicePatch, ServiceStatus, ServiceType, UpdateServiceRequest,
};
pub use user::{Role, User};

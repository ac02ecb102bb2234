// Fee catalog: courses, fee heads, fee structures, bus stops

pub mod controllers;
pub mod models;
pub mod repositories;
pub mod services;

pub use repositories::CatalogRepository;
pub use services::CatalogService;

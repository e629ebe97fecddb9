// Domain layer - Provisioning model and pure rules
pub mod dashboard;
pub mod datasource;
pub mod organization;
pub mod tenant;

pub mod add_step;
pub mod edit;
pub mod import;
pub mod new;
pub mod rm_step;

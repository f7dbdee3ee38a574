mod validator;

pub mod guards;
pub mod model;

pub use model::AuthenticatedUser;
pub use validator::JwtValidator;

pub mod price;
pub mod validator;

mod category;
mod fault;
mod site;

pub use category::Category;
pub use fault::Fault;
pub use site::Site;

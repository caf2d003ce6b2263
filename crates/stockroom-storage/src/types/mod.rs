//! Record types shared by all storage backends.

pub mod ids;
pub mod orders;
pub mod principals;
pub mod products;
pub mod roles;

pub use ids::*;
pub use orders::*;
pub use principals::*;
pub use products::*;
pub use roles::*;

//! stack-config: the identity and API stack as a typed declaration, and the
//! configuration record published once it is deployed.
pub mod definition;
pub mod outputs;
pub mod publish;
pub mod secrets;
pub mod settings;

pub use definition::StackDefinition;
pub use outputs::DeploymentOutputs;
pub use publish::{FilePublisher, Publisher, SsmPublisher};
pub use settings::StackSettings;

pub mod anim;
pub mod document;
pub mod instance;
pub mod scene;

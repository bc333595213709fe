pub mod animation;

pub mod app;

pub mod error;

pub mod gyration;

pub mod output;

pub mod raster;

pub mod renderer;

pub mod scene;

pub mod stats;

pub mod text;

pub mod vertex;

pub mod wave;

pub use error::{Error, ErrorKind, Result};

use std::pin::Pin;

use iced::futures::Stream;

pub mod log;

pub type BoxStream<T> = Pin<Box<dyn Stream<Item = T> + Send>>;

mod tensor_list;

pub use tensor_list::{Metadata, TensorList};

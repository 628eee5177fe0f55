mod locks;
mod position;
mod tree;
mod values;

mod patterns;
mod persistence;

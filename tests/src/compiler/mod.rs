mod config;
mod imports;
mod overloads;
mod scopes;
mod visibility;

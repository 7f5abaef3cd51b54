pub mod hydro_quebec;
pub mod neviweb;
pub mod provider;

pub type GadiParams = gadi_axum::params::RestParams;

pub(crate) mod duration_millis;

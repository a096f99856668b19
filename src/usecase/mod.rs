pub mod intensity;
pub mod notices;
pub mod vibration_loop;

#[cfg(test)]
mod tests_vibration_loop;

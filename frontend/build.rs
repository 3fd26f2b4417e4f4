use dotenvy::dotenv;

// (variable, default) pairs forwarded to the crate as compile time env
const BUILD_VARS: [(&str, &str); 5] = [
  ("COINGECKO_API_URL", "https://api.coingecko.com/api/v3"),
  ("COINGECKO_API_KEY", ""),
  ("APP_BASE_PATH", ""),
  ("RSC_PROBE_FRAGMENTS", "_rsc,.txt"),
  ("APP_LOG_LEVEL", "info"),
];

fn main() {
  // Tell Cargo that if the env file changes, to rerun this build script.
  println!("cargo::rerun-if-changed=.env");

  // a missing .env is fine, every variable has a default
  let _ = dotenv();

  for (name, default) in BUILD_VARS {
    println!("cargo::rerun-if-env-changed={}", name);
    let value = std::env::var(name).unwrap_or_else(|_| default.to_string());
    println!("cargo::rustc-env={}={}", name, value);
  }
}

use std::io::{self, BufRead, IsTerminal, Write};

use brooklyn_lib::credentials::{BrokerCredentials, CredentialsError, CredentialsProvider, PartialCredentials};

use crate::BrokerArgs;

/// Credentials from arguments, environment and profile, prompting on the
/// terminal for anything still missing.
pub struct PromptCredentials {
  known: PartialCredentials,
}

impl PromptCredentials {
  /// Arguments win over `fallback` (environment and profile).
  pub fn new(args: BrokerArgs, fallback: PartialCredentials) -> Self {
    let explicit = PartialCredentials {
      broker: args.broker,
      username: args.username,
      password: args.password,
    };
    Self {
      known: explicit.or(fallback),
    }
  }
}

impl CredentialsProvider for PromptCredentials {
  fn credentials(&self) -> Result<BrokerCredentials, CredentialsError> {
    let missing = self.known.missing();
    if missing.is_empty() {
      return self.known.clone().into_complete();
    }

    if !io::stdin().is_terminal() || !io::stderr().is_terminal() {
      return Err(CredentialsError::Incomplete { missing });
    }

    let mut creds = self.known.clone();
    let stdin = io::stdin();
    let mut input = stdin.lock();
    for field in missing {
      let value = prompt(&mut input, field)?;
      match field {
        "broker" => creds.broker = Some(value),
        "username" => creds.username = Some(value),
        _ => creds.password = Some(value),
      }
    }
    creds.into_complete()
  }
}

fn prompt(input: &mut impl BufRead, field: &'static str) -> Result<String, CredentialsError> {
  let read_err = |source| CredentialsError::Input { field, source };

  write!(io::stderr(), "{}: ", field).map_err(read_err)?;
  io::stderr().flush().map_err(read_err)?;

  let mut line = String::new();
  input.read_line(&mut line).map_err(read_err)?;
  let value = line.trim().to_string();
  if value.is_empty() {
    return Err(CredentialsError::Incomplete { missing: vec![field] });
  }
  Ok(value)
}

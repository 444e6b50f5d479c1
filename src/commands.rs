/// Available commands, matching and argument parsing

#[derive(Debug, Clone)]
pub struct Command {
  pub name: &'static str,
  pub aliases: &'static [&'static str],
  /// Argument placeholder shown in help, empty if none
  pub args: &'static str,
  pub description: &'static str,
}

/// All available commands
pub const COMMANDS: &[Command] = &[
  Command {
    name: "home",
    aliases: &["h", "images"],
    args: "",
    description: "Show a fresh batch of random cats",
  },
  Command {
    name: "more",
    aliases: &["m", "next"],
    args: "",
    description: "Load more random cats",
  },
  Command {
    name: "image",
    aliases: &["i", "show"],
    args: "<image_id>",
    description: "Show an image with its breed details",
  },
  Command {
    name: "close",
    aliases: &["c", "back"],
    args: "",
    description: "Close the image details",
  },
  Command {
    name: "breeds",
    aliases: &["b"],
    args: "",
    description: "List all breeds",
  },
  Command {
    name: "breed",
    aliases: &["br"],
    args: "<breed_id>",
    description: "Show cats of one breed",
  },
  Command {
    name: "favorites",
    aliases: &["favs", "favourites"],
    args: "",
    description: "List your favorite cats",
  },
  Command {
    name: "fav",
    aliases: &["f", "star"],
    args: "<image_id>",
    description: "Mark or unmark an image as favorite",
  },
  Command {
    name: "unfav",
    aliases: &["u", "rm"],
    args: "<favorite_id>",
    description: "Remove a favorite",
  },
  Command {
    name: "refresh",
    aliases: &["r"],
    args: "",
    description: "Reload your favorites",
  },
  Command {
    name: "help",
    aliases: &["?"],
    args: "",
    description: "Show this help",
  },
  Command {
    name: "quit",
    aliases: &["q", "exit"],
    description: "Exit catdex",
    args: "",
  },
];

/// A parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
  Home,
  More,
  Image(String),
  Close,
  Breeds,
  Breed(String),
  Favorites,
  Fav(String),
  Unfav(String),
  Refresh,
  Help,
  Quit,
}

/// Get autocomplete suggestions for a given input
pub fn get_suggestions(input: &str) -> Vec<&'static Command> {
  let input_lower = input.to_lowercase();

  if input_lower.is_empty() {
    return COMMANDS.iter().collect();
  }

  let mut matches: Vec<(&Command, u32)> = Vec::new();

  for cmd in COMMANDS {
    // Exact match on name
    if cmd.name == input_lower {
      matches.push((cmd, 0)); // Highest priority
      continue;
    }

    // Exact match on alias
    if cmd.aliases.contains(&input_lower.as_str()) {
      matches.push((cmd, 1));
      continue;
    }

    // Prefix match on name
    if cmd.name.starts_with(&input_lower) {
      matches.push((cmd, 2));
      continue;
    }

    // Prefix match on alias
    if cmd.aliases.iter().any(|a| a.starts_with(&input_lower)) {
      matches.push((cmd, 3));
      continue;
    }

    // Fuzzy match (contains)
    if cmd.name.contains(&input_lower) {
      matches.push((cmd, 4));
      continue;
    }

    // Fuzzy match on alias
    if cmd.aliases.iter().any(|a| a.contains(&input_lower)) {
      matches.push((cmd, 5));
    }
  }

  // Sort by priority
  matches.sort_by_key(|(_, priority)| *priority);

  matches.into_iter().map(|(cmd, _)| cmd).collect()
}

/// Parse one input line into an action.
///
/// The command word resolves to the best suggestion; the error is a
/// user-facing hint.
pub fn parse(line: &str) -> Result<Action, String> {
  let mut words = line.split_whitespace();
  let Some(word) = words.next() else {
    return Err("Type 'help' for a list of commands".to_string());
  };

  let cmd = get_suggestions(word)
    .into_iter()
    .next()
    .ok_or_else(|| format!("Unknown command: {}", word))?;

  let arg = words.next().map(str::to_string);
  let required = |arg: Option<String>| arg.ok_or_else(|| format!("Usage: {} {}", cmd.name, cmd.args));

  let action = match cmd.name {
    "home" => Action::Home,
    "more" => Action::More,
    "image" => Action::Image(required(arg)?),
    "close" => Action::Close,
    "breeds" => Action::Breeds,
    "breed" => Action::Breed(required(arg)?),
    "favorites" => Action::Favorites,
    "fav" => Action::Fav(required(arg)?),
    "unfav" => Action::Unfav(required(arg)?),
    "refresh" => Action::Refresh,
    "help" => Action::Help,
    "quit" => Action::Quit,
    other => return Err(format!("Unknown command: {}", other)),
  };
  Ok(action)
}

/// Help text listing every command
pub fn help() -> String {
  COMMANDS
    .iter()
    .map(|c| {
      let usage = if c.args.is_empty() {
        c.name.to_string()
      } else {
        format!("{} {}", c.name, c.args)
      };
      format!("  {:<24} {}", usage, c.description)
    })
    .collect::<Vec<_>>()
    .join("\n")
}

use crate::features::auth::{guards::View, types::UserId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellCommand {
    Help,
    WhoAmI,
    Home,
    Login,
    Register,
    ForgotPassword,
    Dashboard,
    Declare,
    Users { page: u32, search: String },
    NextPage,
    PrevPage,
    Toggle(UserId),
    CreateUser,
    EditUser(UserId),
    Logout,
    Back,
    Quit,
}

impl ShellCommand {
    /// View the command opens, if any. Commands without a view are never gated.
    #[must_use]
    pub fn view(&self) -> Option<View> {
        match self {
            Self::Home => Some(View::Home),
            Self::Login => Some(View::Login),
            Self::Register => Some(View::Register),
            Self::ForgotPassword => Some(View::ResetPassword),
            Self::Dashboard => Some(View::Dashboard),
            Self::Declare => Some(View::NewDeclaration),
            Self::Users { .. } | Self::NextPage | Self::PrevPage | Self::Toggle(_) => {
                Some(View::AdminUsers)
            }
            Self::CreateUser => Some(View::AdminCreateUser),
            Self::EditUser(_) => Some(View::AdminEditUser),
            Self::Help | Self::WhoAmI | Self::Logout | Self::Back | Self::Quit => None,
        }
    }
}

pub const HELP: &str = "\
Commands:
  help                      show this help
  whoami                    show the current session
  home                      go to the start page
  login                     sign in
  register                  create an account
  forgot-password           reset your password
  dashboard                 list your declarations
  declare                   file a new declaration
  users [page] [search]     list users (admin)
  next | prev               move through the user list (admin)
  toggle <id>               activate or deactivate a user (admin)
  create-user               create an account (admin)
  edit <id>                 change a user's profile, status or role (admin)
  logout                    sign out
  back                      go back
  quit                      leave the portal

While filling a form, type :q to cancel.";

/// Parses one shell line. Blank lines yield `Ok(None)`.
///
/// # Errors
/// Returns a message for unknown commands or bad arguments.
pub fn parse(line: &str) -> Result<Option<ShellCommand>, String> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let command = match head.to_lowercase().as_str() {
        "help" | "?" => ShellCommand::Help,
        "whoami" => ShellCommand::WhoAmI,
        "home" => ShellCommand::Home,
        "login" => ShellCommand::Login,
        "register" | "signup" => ShellCommand::Register,
        "forgot-password" | "reset-password" => ShellCommand::ForgotPassword,
        "dashboard" | "declarations" => ShellCommand::Dashboard,
        "declare" | "new-declaration" => ShellCommand::Declare,
        "users" => parse_users(&rest),
        "next" => ShellCommand::NextPage,
        "prev" => ShellCommand::PrevPage,
        "toggle" => match rest.as_slice() {
            [id] => ShellCommand::Toggle(parse_user_id(id).ok_or("usage: toggle <numeric id>")?),
            _ => return Err("usage: toggle <id>".to_string()),
        },
        "create-user" => ShellCommand::CreateUser,
        "edit" | "edit-user" => match rest.as_slice() {
            [id] => ShellCommand::EditUser(parse_user_id(id).ok_or("usage: edit <numeric id>")?),
            _ => return Err("usage: edit <id>".to_string()),
        },
        "logout" => ShellCommand::Logout,
        "back" => ShellCommand::Back,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(Some(command))
}

/// `users`, `users 3`, `users ana`, `users 2 ana perez`.
fn parse_users(rest: &[&str]) -> ShellCommand {
    match rest.split_first() {
        Some((first, tail)) => match first.parse::<u32>() {
            Ok(page) if page > 0 => ShellCommand::Users {
                page,
                search: tail.join(" "),
            },
            _ => ShellCommand::Users {
                page: 1,
                search: rest.join(" "),
            },
        },
        None => ShellCommand::Users {
            page: 1,
            search: String::new(),
        },
    }
}

/// Ids typed at the prompt are the numbers the listing shows.
fn parse_user_id(raw: &str) -> Option<UserId> {
    raw.parse::<u64>().ok().map(UserId::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_ignored() {
        assert_eq!(parse("   "), Ok(None));
    }

    #[test]
    fn parses_simple_commands() {
        assert_eq!(parse("LOGIN"), Ok(Some(ShellCommand::Login)));
        assert_eq!(parse("exit"), Ok(Some(ShellCommand::Quit)));
        assert_eq!(
            parse("forgot-password"),
            Ok(Some(ShellCommand::ForgotPassword))
        );
    }

    #[test]
    fn parses_users_arguments() {
        assert_eq!(
            parse("users"),
            Ok(Some(ShellCommand::Users {
                page: 1,
                search: String::new()
            }))
        );
        assert_eq!(
            parse("users 3"),
            Ok(Some(ShellCommand::Users {
                page: 3,
                search: String::new()
            }))
        );
        assert_eq!(
            parse("users 2 ana perez"),
            Ok(Some(ShellCommand::Users {
                page: 2,
                search: "ana perez".to_string()
            }))
        );
        assert_eq!(
            parse("users ana"),
            Ok(Some(ShellCommand::Users {
                page: 1,
                search: "ana".to_string()
            }))
        );
    }

    #[test]
    fn toggle_needs_exactly_one_id() {
        assert_eq!(
            parse("toggle 7"),
            Ok(Some(ShellCommand::Toggle(UserId::Number(7))))
        );
        assert!(parse("toggle").is_err());
        assert!(parse("toggle 1 2").is_err());
    }

    #[test]
    fn user_ids_must_be_numeric() {
        for line in ["toggle ../../login", "toggle abc", "edit ..", "edit -1"] {
            assert!(parse(line).is_err(), "{line}");
        }
        assert_eq!(
            parse("edit 12"),
            Ok(Some(ShellCommand::EditUser(UserId::Number(12))))
        );
        assert_eq!(
            ShellCommand::EditUser(UserId::Number(12)).view(),
            Some(View::AdminEditUser)
        );
    }

    #[test]
    fn unknown_command_is_an_error() {
        assert!(parse("sudo").unwrap_err().contains("unknown command"));
    }

    #[test]
    fn admin_commands_map_to_admin_views() {
        assert_eq!(ShellCommand::NextPage.view(), Some(View::AdminUsers));
        assert_eq!(ShellCommand::CreateUser.view(), Some(View::AdminCreateUser));
        assert_eq!(ShellCommand::Logout.view(), None);
    }
}

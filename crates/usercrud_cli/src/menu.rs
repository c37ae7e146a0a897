//! Interactive console menu.
//!
//! # Responsibility
//! - Read one command per line, collect its input, call one gateway operation
//!   and print the outcome.
//!
//! # Invariants
//! - Commands are processed strictly one at a time.
//! - Bad input aborts the current command, never the loop.
//! - Only `EXIT` or end of input leaves the loop.

use log::{debug, info};
use std::io::{self, BufRead, Write};
use usercrud_core::validation::email;
use usercrud_core::{NewUser, UserDao, UserId, UserPatch};

/// Menu keywords, matched case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuCommand {
    Create,
    FindById,
    ShowAll,
    Update,
    Delete,
    FindByEmail,
    Exit,
}

impl MenuCommand {
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            "CREATE" => Some(Self::Create),
            "FIND_ID" => Some(Self::FindById),
            "SHOW" => Some(Self::ShowAll),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "FIND_E" => Some(Self::FindByEmail),
            "EXIT" => Some(Self::Exit),
            _ => None,
        }
    }

    fn keyword(self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::FindById => "FIND_ID",
            Self::ShowAll => "SHOW",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::FindByEmail => "FIND_E",
            Self::Exit => "EXIT",
        }
    }
}

const MENU_ENTRIES: &[(MenuCommand, &str)] = &[
    (MenuCommand::Create, "create a user"),
    (MenuCommand::FindById, "find a user by ID"),
    (MenuCommand::ShowAll, "show all users"),
    (MenuCommand::Update, "update a user"),
    (MenuCommand::Delete, "delete a user"),
    (MenuCommand::FindByEmail, "find a user by email"),
    (MenuCommand::Exit, "exit"),
];

pub struct Menu<'ctx, R, W> {
    dao: UserDao<'ctx>,
    input: R,
    output: W,
}

impl<'ctx, R: BufRead, W: Write> Menu<'ctx, R, W> {
    pub fn new(dao: UserDao<'ctx>, input: R, output: W) -> Self {
        Self { dao, input, output }
    }

    /// Runs until `EXIT` or end of input.
    ///
    /// # Errors
    /// - Returns console I/O errors; storage failures never end the loop.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.read_line()? else {
                writeln!(self.output)?;
                break;
            };

            match MenuCommand::parse(&choice) {
                Some(MenuCommand::Exit) => break,
                Some(command) => {
                    debug!(
                        "event=menu_command module=cli status=start command={}",
                        command.keyword()
                    );
                    self.execute(command)?;
                }
                None => writeln!(self.output, "[ERROR] Unknown option: {choice}")?,
            }
        }

        info!("event=menu_exit module=cli status=ok");
        Ok(())
    }

    fn execute(&mut self, command: MenuCommand) -> io::Result<()> {
        match command {
            MenuCommand::Create => self.create_user(),
            MenuCommand::FindById => self.find_by_id(),
            MenuCommand::ShowAll => self.show_all(),
            MenuCommand::Update => self.update_user(),
            MenuCommand::Delete => self.delete_user(),
            MenuCommand::FindByEmail => self.find_by_email(),
            MenuCommand::Exit => Ok(()),
        }
    }

    fn show_menu(&mut self) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "   [User directory commands]")?;
        for (command, description) in MENU_ENTRIES {
            writeln!(
                self.output,
                "press --> {{{}}} to {description}",
                command.keyword()
            )?;
        }
        write!(self.output, "press --> ")?;
        self.output.flush()
    }

    fn create_user(&mut self) -> io::Result<()> {
        writeln!(self.output, "... Create New User")?;
        let Some(name) = self.prompt("Enter user name or nickname --> ")? else {
            return Ok(());
        };
        let Some(email) = self.prompt_email("Enter email: ", false)? else {
            return Ok(());
        };
        let Some(age_input) = self.prompt("Enter age: ")? else {
            return Ok(());
        };
        let Ok(age) = age_input.parse::<i32>() else {
            writeln!(self.output, "Invalid age format! Please enter a number.")?;
            return Ok(());
        };

        if name.is_empty() || email.is_empty() {
            writeln!(self.output, "Name and email cannot be empty!")?;
            return Ok(());
        }

        let new_user = NewUser::new(name, email, Some(age));
        if let Err(err) = new_user.validate() {
            writeln!(self.output, "Invalid user data: {err}")?;
            return Ok(());
        }

        match self.dao.create(&new_user) {
            Some(id) => writeln!(self.output, "User created successfully with ID: {id}"),
            None => writeln!(
                self.output,
                "Failed to create user. Email might already exist."
            ),
        }
    }

    fn find_by_id(&mut self) -> io::Result<()> {
        writeln!(self.output, "--> Get User by ID")?;
        let Some(id) = self.prompt_id("Enter User ID: ")? else {
            return Ok(());
        };

        match self.dao.get_by_id(id) {
            Some(user) => writeln!(self.output, "User found:\n{user}"),
            None => writeln!(self.output, "User not found with ID: {id}"),
        }
    }

    fn show_all(&mut self) -> io::Result<()> {
        let users = self.dao.get_all();
        if users.is_empty() {
            return writeln!(self.output, "No users found.");
        }

        writeln!(self.output, "All users:")?;
        for user in users {
            writeln!(self.output, "{user}")?;
        }
        Ok(())
    }

    fn update_user(&mut self) -> io::Result<()> {
        writeln!(self.output, "--> Update User")?;
        let Some(id) = self.prompt_id("Enter User ID to update: ")? else {
            return Ok(());
        };
        let Some(current) = self.dao.get_by_id(id) else {
            return writeln!(self.output, "User not found with ID: {id}");
        };
        writeln!(self.output, "Current user: {current}")?;

        let Some(name) = self.prompt("Enter new name (press Enter to keep current): ")? else {
            return Ok(());
        };
        let Some(email) =
            self.prompt_email("Enter new email (press Enter to keep current): ", true)?
        else {
            return Ok(());
        };
        let Some(age_input) = self.prompt("Enter new age (press Enter to keep current): ")?
        else {
            return Ok(());
        };
        let age = if age_input.is_empty() {
            None
        } else {
            let Ok(age) = age_input.parse::<i32>() else {
                writeln!(self.output, "Invalid number format!")?;
                return Ok(());
            };
            Some(age)
        };

        let patch = UserPatch {
            name: Some(name),
            email: Some(email),
            age,
        };
        if self.dao.update(id, &patch) {
            writeln!(self.output, "User updated successfully.")
        } else if patch.is_empty() {
            writeln!(self.output, "No fields to update.")
        } else {
            writeln!(self.output, "Failed to update user.")
        }
    }

    fn delete_user(&mut self) -> io::Result<()> {
        writeln!(self.output, "--> Delete User")?;
        let Some(id) = self.prompt_id("Enter User ID to delete: ")? else {
            return Ok(());
        };
        let Some(confirmation) = self.prompt(&format!(
            "Are you sure you want to delete user with ID {id}? (y/N): "
        ))?
        else {
            return Ok(());
        };

        if !confirmation.eq_ignore_ascii_case("y") {
            return writeln!(self.output, "Deletion cancelled.");
        }
        if self.dao.delete(id) {
            writeln!(self.output, "User deleted successfully.")
        } else {
            writeln!(self.output, "Failed to delete user or user not found.")
        }
    }

    fn find_by_email(&mut self) -> io::Result<()> {
        writeln!(self.output, "--> Find User by Email")?;
        let Some(email) = self.prompt("Enter email: ")? else {
            return Ok(());
        };

        match self.dao.get_by_email(&email) {
            Some(user) => writeln!(self.output, "User found:\n{user}"),
            None => writeln!(self.output, "User not found with email: {email}"),
        }
    }

    /// Reprompts until the email is valid. With `allow_blank`, an empty line
    /// is accepted and returned as an empty string.
    fn prompt_email(&mut self, label: &str, allow_blank: bool) -> io::Result<Option<String>> {
        loop {
            let Some(candidate) = self.prompt(label)? else {
                return Ok(None);
            };
            if allow_blank && candidate.is_empty() {
                return Ok(Some(candidate));
            }
            if email::is_valid(&candidate) {
                writeln!(self.output, "Email is valid.")?;
                return Ok(Some(candidate));
            }
            writeln!(
                self.output,
                "Invalid email format! Example: user@example.com"
            )?;
        }
    }

    fn prompt_id(&mut self, label: &str) -> io::Result<Option<UserId>> {
        let Some(input) = self.prompt(label)? else {
            return Ok(None);
        };
        match input.parse::<UserId>() {
            Ok(id) => Ok(Some(id)),
            Err(_) => {
                writeln!(self.output, "Invalid ID format!")?;
                Ok(None)
            }
        }
    }

    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        self.read_line()
    }

    /// Next trimmed line, or `None` at end of input. Bytes that are not
    /// UTF-8 are replaced, so a garbled line is handled as ordinary bad input.
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = Vec::new();
        if self.input.read_until(b'\n', &mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&line).trim().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{Menu, MenuCommand};
    use usercrud_core::{NewUser, StoreContext, StoreSettings, UserDao};

    fn run_script(context: &StoreContext, script: &str) -> String {
        run_bytes(context, script.as_bytes())
    }

    fn run_bytes(context: &StoreContext, script: &[u8]) -> String {
        let mut output = Vec::new();
        Menu::new(UserDao::new(context), script, &mut output)
            .run()
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    fn context_with_alice() -> StoreContext {
        let context = StoreContext::open(StoreSettings::in_memory()).unwrap();
        UserDao::new(&context)
            .create(&NewUser::new("Alice", "alice@example.com", Some(30)))
            .unwrap();
        context
    }

    #[test]
    fn commands_are_case_sensitive() {
        assert_eq!(MenuCommand::parse("CREATE"), Some(MenuCommand::Create));
        assert_eq!(MenuCommand::parse("FIND_E"), Some(MenuCommand::FindByEmail));
        assert_eq!(MenuCommand::parse("create"), None);
        assert_eq!(MenuCommand::parse("EXIT "), None);
    }

    #[test]
    fn create_reprompts_for_email_then_finds_by_email() {
        let context = StoreContext::open(StoreSettings::in_memory()).unwrap();
        let output = run_script(
            &context,
            "CREATE\nAlice\nnot-an-email\nalice@example.com\n30\nFIND_E\nalice@example.com\nEXIT\n",
        );

        assert!(output.contains("Invalid email format!"));
        assert!(output.contains("User created successfully with ID: 1"));
        assert!(output.contains("username = 'Alice', email = 'alice@example.com', age = 30"));
    }

    #[test]
    fn invalid_age_aborts_command_but_not_loop() {
        let context = StoreContext::open(StoreSettings::in_memory()).unwrap();
        let output = run_script(&context, "CREATE\nBob\nbob@example.com\nabc\nSHOW\nEXIT\n");

        assert!(output.contains("Invalid age format!"));
        assert!(output.contains("No users found."));
    }

    #[test]
    fn empty_name_is_rejected() {
        let context = StoreContext::open(StoreSettings::in_memory()).unwrap();
        let output = run_script(&context, "CREATE\n\nbob@example.com\n20\nEXIT\n");

        assert!(output.contains("Name and email cannot be empty!"));
        assert!(UserDao::new(&context).get_all().is_empty());
    }

    #[test]
    fn duplicate_email_reports_failure() {
        let context = context_with_alice();
        let output = run_script(&context, "CREATE\nAlicia\nalice@example.com\n25\nEXIT\n");

        assert!(output.contains("Failed to create user. Email might already exist."));
        assert_eq!(UserDao::new(&context).get_all().len(), 1);
    }

    #[test]
    fn unknown_command_redisplays_menu() {
        let context = StoreContext::open(StoreSettings::in_memory()).unwrap();
        let output = run_script(&context, "create\nEXIT\n");

        assert!(output.contains("[ERROR] Unknown option: create"));
        assert_eq!(output.matches("[User directory commands]").count(), 2);
    }

    #[test]
    fn update_keeps_blank_fields() {
        let context = context_with_alice();
        let output = run_script(&context, "UPDATE\n1\n\n\n31\nEXIT\n");

        assert!(output.contains("User updated successfully."));
        let user = UserDao::new(&context).get_by_id(1).unwrap();
        assert_eq!(user.name, "Alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.age, Some(31));
    }

    #[test]
    fn update_reprompts_invalid_email() {
        let context = context_with_alice();
        let output = run_script(&context, "UPDATE\n1\n\nbroken\nalice@new.example.org\n\nEXIT\n");

        assert!(output.contains("Invalid email format!"));
        assert!(output.contains("User updated successfully."));
        let user = UserDao::new(&context).get_by_id(1).unwrap();
        assert_eq!(user.email, "alice@new.example.org");
        assert_eq!(user.age, Some(30));
    }

    #[test]
    fn update_with_nothing_reports_no_fields() {
        let context = context_with_alice();
        let output = run_script(&context, "UPDATE\n1\n\n\n\nEXIT\n");

        assert!(output.contains("No fields to update."));
    }

    #[test]
    fn update_of_missing_user_returns_to_menu() {
        let context = context_with_alice();
        let output = run_script(&context, "UPDATE\n9\nSHOW\nEXIT\n");

        assert!(output.contains("User not found with ID: 9"));
        assert!(output.contains("All users:"));
    }

    #[test]
    fn delete_requires_confirmation() {
        let context = context_with_alice();

        let output = run_script(&context, "DELETE\n1\nn\nEXIT\n");
        assert!(output.contains("Deletion cancelled."));
        assert!(UserDao::new(&context).get_by_id(1).is_some());

        let output = run_script(&context, "DELETE\n1\nY\nFIND_ID\n1\nEXIT\n");
        assert!(output.contains("User deleted successfully."));
        assert!(output.contains("User not found with ID: 1"));
    }

    #[test]
    fn non_numeric_id_is_reported() {
        let context = context_with_alice();
        let output = run_script(&context, "FIND_ID\none\nEXIT\n");

        assert!(output.contains("Invalid ID format!"));
    }

    #[test]
    fn end_of_input_exits_cleanly() {
        let context = context_with_alice();
        let output = run_script(&context, "SHOW\n");

        assert!(output.contains("[User INFO] id = 1"));
    }

    #[test]
    fn non_utf8_line_is_an_unknown_option() {
        let context = context_with_alice();
        let output = run_bytes(&context, b"\xff\xfe\nSHOW\nEXIT\n");

        assert!(output.contains("[ERROR] Unknown option: \u{fffd}\u{fffd}"));
        assert!(output.contains("[User INFO] id = 1"));
    }

    #[test]
    fn non_utf8_id_is_reported_as_bad_id() {
        let context = context_with_alice();
        let output = run_bytes(&context, b"FIND_ID\n\xff\nSHOW\nEXIT\n");

        assert!(output.contains("Invalid ID format!"));
        assert!(output.contains("All users:"));
    }

    #[test]
    fn over_long_name_reports_the_reason() {
        let context = StoreContext::open(StoreSettings::in_memory()).unwrap();
        let script = format!("CREATE\n{}\nbob@example.com\n20\nEXIT\n", "n".repeat(101));
        let output = run_script(&context, &script);

        assert!(output.contains("Invalid user data: name"));
        assert!(!output.contains("Email might already exist."));
        assert!(UserDao::new(&context).get_all().is_empty());
    }
}

//! Line-oriented menu loop over a `UserStore`.
//!
//! # Responsibility
//! - Collect raw input, parse integers, call the store, render outcomes.
//! - Own every user-facing message; the store never prints.
//!
//! # Invariants
//! - A failed action only ends that action; the loop keeps running.
//! - Exit and end of input both print the final user list.

use crate::input::{non_blank, parse_int, ParseError};
use log::debug;
use std::io::{self, BufRead, Write};
use usuario_core::{StoreError, StoreErrorKind, UserDraft, UserRecord, UserStore};

const MENU: &str = "
=== Menu ===
1 - Add user
2 - List users
3 - Edit user
4 - Delete user
5 - Find users by name
6 - Show user by id
0 - Exit";

/// Interactive menu bound to one store and one input/output pair.
pub struct Menu<'s, R, W> {
    store: &'s mut dyn UserStore,
    input: R,
    output: W,
}

impl<'s, R: BufRead, W: Write> Menu<'s, R, W> {
    pub fn new(store: &'s mut dyn UserStore, input: R, output: W) -> Self {
        Self {
            store,
            input,
            output,
        }
    }

    /// Runs until the user picks exit or input ends.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{MENU}")?;
            let Some(choice) = self.prompt("Choose an option: ")? else {
                break;
            };
            debug!("event=menu_choice module=cli option={}", choice.trim());

            match choice.trim() {
                "1" => self.add_user()?,
                "2" => self.list_users()?,
                "3" => self.edit_user()?,
                "4" => self.delete_user()?,
                "5" => self.find_users()?,
                "6" => self.show_user()?,
                "0" => break,
                _ => writeln!(self.output, "Invalid option. Try again.")?,
            }
        }

        writeln!(self.output, "\nRegistered users (final):")?;
        self.list_users()?;
        writeln!(self.output, "Shutting down...")?;
        self.output.flush()
    }

    fn add_user(&mut self) -> io::Result<()> {
        let Some(name) = self.prompt("Name: ")? else {
            return Ok(());
        };
        let Some(age) = self.prompt_int("Age: ", "age")? else {
            return Ok(());
        };
        let Some(email) = self.prompt("Email: ")? else {
            return Ok(());
        };

        match self.store.add(&UserDraft::new(name, age, email.trim())) {
            Ok(user) => writeln!(self.output, "User added with id {}.", user.id),
            Err(err) => self.report(&err),
        }
    }

    fn list_users(&mut self) -> io::Result<()> {
        match self.store.list() {
            Ok(users) if users.is_empty() => writeln!(self.output, "No users registered."),
            Ok(users) => self.print_users(&users),
            Err(err) => self.report(&err),
        }
    }

    fn edit_user(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_int("Id of the user to edit: ", "id")? else {
            return Ok(());
        };
        let current = match self.store.get(id) {
            Ok(user) => user,
            Err(err) => return self.report(&err),
        };

        writeln!(self.output, "Leave a field blank to keep its current value.")?;
        let Some(name) = self.prompt(&format!("New name [{}]: ", current.name))? else {
            return Ok(());
        };
        let Some(age) = self.prompt(&format!("New age [{}]: ", current.age))? else {
            return Ok(());
        };
        let age = match non_blank(&age).map(|raw| parse_int(raw, "age")) {
            None => current.age,
            Some(Ok(age)) => age,
            Some(Err(err)) => return self.report_parse(&err),
        };
        let Some(email) = self.prompt(&format!("New email [{}]: ", current.email))? else {
            return Ok(());
        };

        let draft = UserDraft::new(
            non_blank(&name).unwrap_or(current.name.as_str()),
            age,
            non_blank(&email).unwrap_or(current.email.as_str()),
        );
        match self.store.edit(id, &draft) {
            Ok(_) => writeln!(self.output, "User updated."),
            Err(err) => self.report(&err),
        }
    }

    fn delete_user(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_int("Id of the user to delete: ", "id")? else {
            return Ok(());
        };
        match self.store.delete(id) {
            Ok(user) => writeln!(self.output, "User {} removed.", user.id),
            Err(err) => self.report(&err),
        }
    }

    fn find_users(&mut self) -> io::Result<()> {
        let Some(fragment) = self.prompt("Name contains: ")? else {
            return Ok(());
        };
        match self.store.find_by_name(&fragment) {
            Ok(users) if users.is_empty() => writeln!(self.output, "No matching users."),
            Ok(users) => self.print_users(&users),
            Err(err) => self.report(&err),
        }
    }

    fn show_user(&mut self) -> io::Result<()> {
        let Some(id) = self.prompt_int("Id: ", "id")? else {
            return Ok(());
        };
        match self.store.get(id) {
            Ok(user) => self.print_users(std::slice::from_ref(&user)),
            Err(err) => self.report(&err),
        }
    }

    fn print_users(&mut self, users: &[UserRecord]) -> io::Result<()> {
        for user in users {
            writeln!(
                self.output,
                "ID: {}, Name: {}, Age: {}, Email: {}",
                user.id, user.name, user.age, user.email
            )?;
        }
        Ok(())
    }

    /// Writes `label` and reads one line; `None` once input is exhausted.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// Like `prompt`, but a non-integer answer reports a parse error and
    /// aborts the action (`None`).
    fn prompt_int(&mut self, label: &str, field: &'static str) -> io::Result<Option<i64>> {
        let Some(raw) = self.prompt(label)? else {
            return Ok(None);
        };
        match parse_int(&raw, field) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                self.report_parse(&err)?;
                Ok(None)
            }
        }
    }

    fn report_parse(&mut self, err: &ParseError) -> io::Result<()> {
        writeln!(self.output, "Invalid input: {err}.")
    }

    fn report(&mut self, err: &StoreError) -> io::Result<()> {
        let message = match err.kind() {
            StoreErrorKind::InvalidName => {
                "Invalid name: it must have between 3 and 100 printable characters.".to_string()
            }
            StoreErrorKind::InvalidAge => "Invalid age: it must be between 0 and 150.".to_string(),
            StoreErrorKind::InvalidEmail => {
                "Invalid email: expected something like name@domain.com.".to_string()
            }
            StoreErrorKind::DuplicateEmail => "This email is already registered.".to_string(),
            StoreErrorKind::NotFound => "User not found.".to_string(),
            StoreErrorKind::StorageError => format!("Storage failure: {err}"),
        };
        writeln!(self.output, "{message}")
    }
}

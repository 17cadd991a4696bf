//! Editable form state for the add-book and create-user pages.

use stacks_core::models::{NewBook, NewUser, ValidationError};
use stacks_core::Role;

use crate::app::can_add_field_char;

/// Maximum length for free-text form fields
const MAX_FIELD_LENGTH: usize = 100;

/// Maximum length for the copies field
const MAX_COPIES_LENGTH: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Title,
    Author,
    Genre,
    Isbn,
    TotalCopies,
    Submit,
}

impl BookField {
    pub const ALL: [BookField; 6] = [
        BookField::Title,
        BookField::Author,
        BookField::Genre,
        BookField::Isbn,
        BookField::TotalCopies,
        BookField::Submit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            BookField::Title => "Title",
            BookField::Author => "Author",
            BookField::Genre => "Genre",
            BookField::Isbn => "ISBN",
            BookField::TotalCopies => "Total Copies",
            BookField::Submit => "Add Book",
        }
    }

    pub fn next(&self) -> Self {
        cycle(&Self::ALL, *self, 1)
    }

    pub fn prev(&self) -> Self {
        cycle(&Self::ALL, *self, Self::ALL.len() - 1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserField {
    Username,
    Password,
    FirstName,
    LastName,
    Email,
    Role,
    Submit,
}

impl UserField {
    pub const ALL: [UserField; 7] = [
        UserField::Username,
        UserField::Password,
        UserField::FirstName,
        UserField::LastName,
        UserField::Email,
        UserField::Role,
        UserField::Submit,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            UserField::Username => "Username",
            UserField::Password => "Password",
            UserField::FirstName => "First Name",
            UserField::LastName => "Last Name",
            UserField::Email => "Email",
            UserField::Role => "Role",
            UserField::Submit => "Create User",
        }
    }

    pub fn next(&self) -> Self {
        cycle(&Self::ALL, *self, 1)
    }

    pub fn prev(&self) -> Self {
        cycle(&Self::ALL, *self, Self::ALL.len() - 1)
    }
}

fn cycle<T: Copy + PartialEq>(all: &[T], current: T, step: usize) -> T {
    let index = all.iter().position(|f| *f == current).unwrap_or(0);
    all[(index + step) % all.len()]
}

fn push_limited(value: &mut String, c: char, max: usize) {
    if can_add_field_char(value.chars().count(), c, max) {
        value.push(c);
    }
}

/// Add-book form. Copies stay text until submit so partial input can be edited.
#[derive(Debug, Clone)]
pub struct BookForm {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub isbn: String,
    pub total_copies: String,
    pub focus: BookField,
}

impl Default for BookForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            genre: String::new(),
            isbn: String::new(),
            total_copies: NewBook::default().total_copies.to_string(),
            focus: BookField::Title,
        }
    }
}

impl BookForm {
    pub fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Author => &self.author,
            BookField::Genre => &self.genre,
            BookField::Isbn => &self.isbn,
            BookField::TotalCopies => &self.total_copies,
            BookField::Submit => "",
        }
    }

    pub fn push(&mut self, c: char) {
        match self.focus {
            BookField::Title => push_limited(&mut self.title, c, MAX_FIELD_LENGTH),
            BookField::Author => push_limited(&mut self.author, c, MAX_FIELD_LENGTH),
            BookField::Genre => push_limited(&mut self.genre, c, MAX_FIELD_LENGTH),
            BookField::Isbn => push_limited(&mut self.isbn, c, MAX_FIELD_LENGTH),
            BookField::TotalCopies => {
                if c.is_ascii_digit() {
                    push_limited(&mut self.total_copies, c, MAX_COPIES_LENGTH);
                }
            }
            BookField::Submit => {}
        }
    }

    pub fn pop(&mut self) {
        let value = match self.focus {
            BookField::Title => &mut self.title,
            BookField::Author => &mut self.author,
            BookField::Genre => &mut self.genre,
            BookField::Isbn => &mut self.isbn,
            BookField::TotalCopies => &mut self.total_copies,
            BookField::Submit => return,
        };
        value.pop();
    }

    /// Build the payload, checking it the way the API will
    pub fn to_new_book(&self) -> Result<NewBook, ValidationError> {
        let total_copies = self
            .total_copies
            .trim()
            .parse::<i32>()
            .map_err(|_| ValidationError::new("total_copies", "Enter a whole number."))?;

        let book = NewBook {
            title: self.title.clone(),
            author: self.author.clone(),
            genre: self.genre.clone(),
            isbn: self.isbn.clone(),
            total_copies,
        };
        book.validate()?;
        Ok(book.normalized())
    }
}

/// Create-user form shown over the user list
#[derive(Debug, Clone)]
pub struct UserForm {
    pub username: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
    pub focus: UserField,
}

impl Default for UserForm {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            role: Role::default(),
            focus: UserField::Username,
        }
    }
}

impl UserForm {
    pub fn value(&self, field: UserField) -> &str {
        match field {
            UserField::Username => &self.username,
            UserField::Password => &self.password,
            UserField::FirstName => &self.first_name,
            UserField::LastName => &self.last_name,
            UserField::Email => &self.email,
            UserField::Role => self.role.display_name(),
            UserField::Submit => "",
        }
    }

    pub fn push(&mut self, c: char) {
        let value = match self.focus {
            UserField::Username => &mut self.username,
            UserField::Password => &mut self.password,
            UserField::FirstName => &mut self.first_name,
            UserField::LastName => &mut self.last_name,
            UserField::Email => &mut self.email,
            UserField::Role => {
                if c == ' ' {
                    self.role = self.role.toggled();
                }
                return;
            }
            UserField::Submit => return,
        };
        push_limited(value, c, MAX_FIELD_LENGTH);
    }

    pub fn pop(&mut self) {
        let value = match self.focus {
            UserField::Username => &mut self.username,
            UserField::Password => &mut self.password,
            UserField::FirstName => &mut self.first_name,
            UserField::LastName => &mut self.last_name,
            UserField::Email => &mut self.email,
            UserField::Role | UserField::Submit => return,
        };
        value.pop();
    }

    pub fn to_new_user(&self) -> Result<NewUser, ValidationError> {
        let user = NewUser {
            username: self.username.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_string(),
            user_type: self.role,
        };
        user.validate()?;
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_book_form() -> BookForm {
        let mut form = BookForm::default();
        for (field, text) in [
            (BookField::Title, " Dune "),
            (BookField::Author, "Frank Herbert"),
            (BookField::Genre, "Science Fiction"),
            (BookField::Isbn, "978-0-441-17271-9"),
        ] {
            form.focus = field;
            text.chars().for_each(|c| form.push(c));
        }
        form
    }

    #[test]
    fn test_field_cycling_wraps() {
        assert_eq!(BookField::Submit.next(), BookField::Title);
        assert_eq!(BookField::Title.prev(), BookField::Submit);
        assert_eq!(UserField::Role.next(), UserField::Submit);
        assert_eq!(UserField::Username.prev(), UserField::Submit);
    }

    #[test]
    fn test_book_form_builds_normalized_payload() {
        let book = filled_book_form().to_new_book().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.isbn, "9780441172719");
        assert_eq!(book.total_copies, 1);
    }

    #[test]
    fn test_copies_field_accepts_digits_only() {
        let mut form = filled_book_form();
        form.focus = BookField::TotalCopies;
        form.pop();
        for c in "1x2".chars() {
            form.push(c);
        }
        assert_eq!(form.total_copies, "12");
        assert_eq!(form.to_new_book().unwrap().total_copies, 12);
    }

    #[test]
    fn test_empty_copies_is_a_field_error() {
        let mut form = filled_book_form();
        form.total_copies.clear();
        assert_eq!(form.to_new_book().unwrap_err().field, "total_copies");
    }

    #[test]
    fn test_book_form_reports_missing_field() {
        let mut form = filled_book_form();
        form.genre.clear();
        assert_eq!(form.to_new_book().unwrap_err().field, "genre");
    }

    #[test]
    fn test_space_toggles_role_only_on_role_field() {
        let mut form = UserForm::default();
        form.push(' ');
        assert_eq!(form.username, " ");
        assert_eq!(form.role, Role::Student);

        form.focus = UserField::Role;
        form.push(' ');
        assert_eq!(form.role, Role::Librarian);
        form.push('x');
        assert_eq!(form.role, Role::Librarian);
        form.push(' ');
        assert_eq!(form.role, Role::Student);
    }

    #[test]
    fn test_user_form_builds_payload() {
        let form = UserForm {
            username: " marian ".to_string(),
            password: " pw ".to_string(),
            first_name: "Marian".to_string(),
            last_name: "Paroo".to_string(),
            email: "marian@river.city".to_string(),
            role: Role::Librarian,
            focus: UserField::Submit,
        };
        let user = form.to_new_user().unwrap();
        assert_eq!(user.username, "marian");
        assert_eq!(user.password, " pw ");
        assert_eq!(user.user_type, Role::Librarian);
    }

    #[test]
    fn test_user_form_rejects_bad_email() {
        let form = UserForm {
            username: "m".to_string(),
            password: "p".to_string(),
            first_name: "M".to_string(),
            last_name: "P".to_string(),
            email: "not-an-email".to_string(),
            ..UserForm::default()
        };
        assert_eq!(form.to_new_user().unwrap_err().field, "email");
    }

    #[test]
    fn test_field_length_is_capped() {
        let mut form = BookForm::default();
        for _ in 0..(MAX_FIELD_LENGTH + 10) {
            form.push('a');
        }
        assert_eq!(form.title.len(), MAX_FIELD_LENGTH);
    }
}

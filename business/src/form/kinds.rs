//! The three forms of the console: admin login, admin registration and the user editor.

use crate::model::{AdminRole, Gender, LoginRequest, RegisterRequest, User, UserDraft};

use super::{FieldSpec, FieldValues, Form, FormSchema, Rule};

const GENDER_OPTIONS: &[&str] = &["Male", "Female", "Other"];
const ROLE_OPTIONS: &[&str] = &["admin", "super_admin"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoginField {
    Email,
    Password,
}

/// Admin sign-in.
#[derive(Debug)]
pub struct LoginForm;

impl FormSchema for LoginForm {
    type Field = LoginField;
    type Payload = LoginRequest;

    const NAME: &'static str = "login";
    const FIELDS: &'static [FieldSpec<LoginField>] = &[
        FieldSpec::new(LoginField::Email, "Email", &[Rule::Required, Rule::Email]),
        FieldSpec::secret(LoginField::Password, "Password", &[Rule::Required, Rule::MinLength(6)]),
    ];

    fn payload(values: &FieldValues<LoginField>) -> Option<LoginRequest> {
        Some(LoginRequest {
            email: values.trimmed(LoginField::Email),
            // Passwords are sent as typed.
            password: values.get(LoginField::Password).to_owned(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterField {
    Name,
    Phone,
    Email,
    Password,
    Role,
}

/// New admin account.
#[derive(Debug)]
pub struct RegisterForm;

impl FormSchema for RegisterForm {
    type Field = RegisterField;
    type Payload = RegisterRequest;

    const NAME: &'static str = "register";
    const FIELDS: &'static [FieldSpec<RegisterField>] = &[
        FieldSpec::new(RegisterField::Name, "Name", &[Rule::Required]),
        FieldSpec::new(RegisterField::Phone, "Phone", &[Rule::Required]),
        FieldSpec::new(RegisterField::Email, "Email", &[Rule::Required, Rule::Email]),
        FieldSpec::secret(
            RegisterField::Password,
            "Password",
            &[Rule::Required, Rule::MinLength(6)],
        ),
        FieldSpec::new(RegisterField::Role, "Role", &[Rule::Required, Rule::OneOf(ROLE_OPTIONS)]),
    ];

    fn payload(values: &FieldValues<RegisterField>) -> Option<RegisterRequest> {
        Some(RegisterRequest {
            name: values.trimmed(RegisterField::Name),
            phone: values.trimmed(RegisterField::Phone),
            email: values.trimmed(RegisterField::Email),
            password: values.get(RegisterField::Password).to_owned(),
            role: values.get(RegisterField::Role).parse::<AdminRole>().ok()?,
        })
    }
}

impl Form<RegisterForm> {
    /// A blank registration form with the role preselected, as the sign-up screen shows it.
    pub fn with_default_role() -> Self {
        Self::with_values([(RegisterField::Role, AdminRole::Admin.as_str().to_owned())])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum UserField {
    Names,
    Age,
    Gender,
    Residence,
    Guardian,
}

/// Add and edit user record.
#[derive(Debug)]
pub struct UserForm;

impl FormSchema for UserForm {
    type Field = UserField;
    type Payload = UserDraft;

    const NAME: &'static str = "user";
    const FIELDS: &'static [FieldSpec<UserField>] = &[
        FieldSpec::new(UserField::Names, "Names", &[Rule::Required]),
        FieldSpec::new(UserField::Age, "Age", &[Rule::Required, Rule::PositiveInteger]),
        FieldSpec::new(UserField::Gender, "Gender", &[Rule::Required, Rule::OneOf(GENDER_OPTIONS)]),
        FieldSpec::new(UserField::Residence, "Residence", &[Rule::Required]),
        FieldSpec::new(UserField::Guardian, "Guardian", &[Rule::Required]),
    ];

    fn payload(values: &FieldValues<UserField>) -> Option<UserDraft> {
        Some(UserDraft {
            names: values.trimmed(UserField::Names),
            age: values.trimmed(UserField::Age).parse().ok()?,
            residence: values.trimmed(UserField::Residence),
            guardian: values.trimmed(UserField::Guardian),
            gender: values.get(UserField::Gender).parse::<Gender>().ok()?,
        })
    }
}

impl Form<UserForm> {
    /// Pre-populated from an existing record, for edit mode.
    pub fn from_user(user: &User) -> Self {
        Self::with_values([
            (UserField::Names, user.names.clone()),
            (UserField::Age, user.age.to_string()),
            (UserField::Gender, user.gender.as_str().to_owned()),
            (UserField::Residence, user.residence.clone()),
            (UserField::Guardian, user.guardian.clone()),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled_user_form() -> Form<UserForm> {
        let mut form = Form::<UserForm>::new();
        form.on_change(UserField::Names, " Ada Obi ");
        form.on_change(UserField::Age, "12");
        form.on_change(UserField::Gender, "Female");
        form.on_change(UserField::Residence, "Kigali");
        form.on_change(UserField::Guardian, "Grace Obi");
        form
    }

    #[test]
    fn test_user_payload_trims_and_parses() {
        let mut form = filled_user_form();
        assert!(form.validate());

        let draft = UserForm::payload(&form.values).unwrap();
        assert_eq!(draft.names, "Ada Obi");
        assert_eq!(draft.age, 12);
        assert_eq!(draft.gender, Gender::Female);
    }

    #[test]
    fn test_user_age_must_be_positive() {
        let mut form = filled_user_form();
        form.on_change(UserField::Age, "0");
        assert!(!form.validate());
        assert_eq!(
            form.error(UserField::Age),
            Some("Age must be a positive whole number")
        );
    }

    #[test]
    fn test_user_gender_must_be_listed() {
        let mut form = filled_user_form();
        form.on_change(UserField::Gender, "");
        assert!(!form.validate());
        assert_eq!(form.error(UserField::Gender), Some("Gender is required"));
    }

    #[test]
    fn test_from_user_prefills_every_field() {
        let user = User {
            id: "1".to_owned(),
            names: "Tom".to_owned(),
            age: 9,
            residence: "Huye".to_owned(),
            guardian: "Ann".to_owned(),
            gender: Gender::Male,
        };
        let mut form = Form::<UserForm>::from_user(&user);

        assert_eq!(form.value(UserField::Age), "9");
        assert_eq!(form.value(UserField::Gender), "Male");
        assert!(form.validate());
        assert_eq!(UserForm::payload(&form.values), Some(user.draft()));
    }

    #[test]
    fn test_register_requires_every_field() {
        let mut form = Form::<RegisterForm>::new();
        assert!(!form.validate());
        let labels: Vec<&str> = form.errors().into_iter().map(|(label, _)| label).collect();
        assert_eq!(labels, ["Name", "Phone", "Email", "Password", "Role"]);
    }

    #[test]
    fn test_register_default_role_is_admin() {
        let mut form = Form::<RegisterForm>::with_default_role();
        form.on_change(RegisterField::Name, "Root");
        form.on_change(RegisterField::Phone, "0788000000");
        form.on_change(RegisterField::Email, "root@example.com");
        form.on_change(RegisterField::Password, "secret1");

        assert!(form.validate());
        let request = RegisterForm::payload(&form.values).unwrap();
        assert_eq!(request.role, AdminRole::Admin);
    }

    #[test]
    fn test_register_rejects_unknown_role() {
        let mut form = Form::<RegisterForm>::with_default_role();
        form.on_change(RegisterField::Role, "owner");
        form.validate();
        assert_eq!(
            form.error(RegisterField::Role),
            Some("Role must be one of: admin, super_admin")
        );
    }
}

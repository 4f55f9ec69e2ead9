//! TypeScript type generation module.
//!
//! Exports TypeScript definitions for the public models so browser-side code
//! can share them. Runs as a test; the output directory is taken from
//! `ACCESS_TS_OUTPUT_DIR`, falling back to `../ts-bindings`.

#[cfg(test)]
mod tests {
    use std::env;
    use std::path::PathBuf;
    use ts_rs::TS;

    #[test]
    fn generate_typescript_types() {
        let output_dir = env::var("ACCESS_TS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("../ts-bindings"));

        if !output_dir.exists() {
            std::fs::create_dir_all(&output_dir).expect("Failed to create output directory");
        }

        use crate::models::*;

        Role::export_all_to(&output_dir).expect("Failed to export Role type");
        RoleInput::export_all_to(&output_dir).expect("Failed to export RoleInput type");
        RoleUpdate::export_all_to(&output_dir).expect("Failed to export RoleUpdate type");

        Admin::export_all_to(&output_dir).expect("Failed to export Admin type");
        AdminInput::export_all_to(&output_dir).expect("Failed to export AdminInput type");
        AdminUpdate::export_all_to(&output_dir).expect("Failed to export AdminUpdate type");

        User::export_all_to(&output_dir).expect("Failed to export User type");
        UserWithRoles::export_all_to(&output_dir).expect("Failed to export UserWithRoles type");
        UserRole::export_all_to(&output_dir).expect("Failed to export UserRole type");

        assert!(output_dir.join("Role.ts").exists());
        println!("TypeScript types generated successfully in {:?}", output_dir);
    }
}

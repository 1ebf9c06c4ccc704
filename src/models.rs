pub mod referralmodel;
pub mod shopmodel;
pub mod usermodel;

pub mod collate;
pub mod prenatal;

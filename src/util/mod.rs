pub mod hash_utils;

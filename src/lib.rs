#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![no_std]

pub use bean_reflect as reflect;
pub use bean_utils as utils;

// SPDX-License-Identifier: MIT

pub mod expr;
pub mod menu;

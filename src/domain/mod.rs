// Domain layer - Core ventilator monitoring models
pub mod alarm;
pub mod cache;
pub mod catalog;
pub mod fragment;
pub mod layout;
pub mod series;

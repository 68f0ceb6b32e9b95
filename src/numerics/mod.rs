pub mod polyfit;

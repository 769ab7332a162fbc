// Solar position from the NOAA general solar position approximation:
// https://gml.noaa.gov/grad/solcalc/solareqns.PDF

use chrono::{Datelike, NaiveDateTime, Timelike};
use std::f64::consts::PI;

fn days_in_year(year: i32) -> f64 {
    if (year % 4 == 0 && year % 100 != 0) || year % 400 == 0 {
        366.0
    } else {
        365.0
    }
}

fn hours_from_midnight(date: NaiveDateTime) -> f64 {
    date.num_seconds_from_midnight() as f64 / 3600.0
}

/// Fractional year in radians
fn fractional_year(date: NaiveDateTime) -> f64 {
    let day = date.ordinal() as f64 - 1.0 + (hours_from_midnight(date) - 12.0) / 24.0;
    2.0 * PI / days_in_year(date.year()) * day
}

/// Equation of time in minutes
pub fn equation_of_time(date: NaiveDateTime) -> f64 {
    let g = fractional_year(date);
    let first = 0.000075 + 0.001868 * g.cos() - 0.032077 * g.sin();
    let second = 0.014615 * (2.0 * g).cos() + 0.040849 * (2.0 * g).sin();
    229.18 * (first - second)
}

/// Solar declination in degrees
pub fn solar_declination(date: NaiveDateTime) -> f64 {
    let g = fractional_year(date);
    let first = 0.006918 - 0.399912 * g.cos() + 0.070257 * g.sin();
    let second = -0.006758 * (2.0 * g).cos() + 0.000907 * (2.0 * g).sin();
    let third = -0.002697 * (3.0 * g).cos() + 0.00148 * (3.0 * g).sin();
    (first + second + third).to_degrees()
}

/// Solar zenith angle in degrees for a UTC time and a location in degrees.
pub fn sun_zenithal_angle(date: NaiveDateTime, longitude: f64, latitude: f64) -> f64 {
    // True solar time in minutes
    let solar_time = hours_from_midnight(date) * 60.0 + equation_of_time(date) + 4.0 * longitude;
    let hour_angle = (solar_time / 4.0 - 180.0).to_radians();

    let latitude_rad = latitude.to_radians();
    let declination_rad = solar_declination(date).to_radians();

    let cos_zenith = latitude_rad.sin() * declination_rad.sin()
        + latitude_rad.cos() * declination_rad.cos() * hour_angle.cos();

    cos_zenith.clamp(-1.0, 1.0).acos().to_degrees()
}

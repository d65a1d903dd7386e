//! Human-friendly text rendering of a forecast.

use weathernow_core::Units;
use weathernow_core::model::Forecast;

const WEEKDAYS: [&str; 7] =
    ["Monday", "Tuesday", "Wednesday", "Thursday", "Friday", "Saturday", "Sunday"];

/// Print the overview, details, daily and hourly blocks of a forecast.
/// `day_slot` selects the hourly day to print (0 = Monday).
pub fn print_forecast(forecast: &Forecast, units: Units, day_slot: usize) {
    let today = &forecast.current;

    println!();
    println!("{}", forecast.place);
    println!("{}", today.time.format("%A, %b %-d, %Y"));
    println!("{}  {}", today.condition.label(), units.temperature.format(today.temperature_c));

    println!();
    println!("Feels Like     {}", units.temperature.format(today.feels_like_c));
    println!("Humidity       {}%", today.humidity_pct);
    println!("Wind           {}", units.wind.format(today.wind_kmh));
    println!("Precipitation  {}", units.precipitation.format(today.precipitation_mm));

    println!();
    println!("Daily forecast");
    for day in &forecast.daily {
        println!(
            "  {}  {:<14} {} / {}",
            day.date.format("%a"),
            day.condition.label(),
            units.temperature.format(day.high_c),
            units.temperature.format(day.low_c),
        );
    }

    println!();
    let marker = if day_slot == forecast.week.today_slot() { " (today)" } else { "" };
    println!("Hourly forecast: {}{marker}", WEEKDAYS[day_slot]);
    for hour in forecast.week.day(day_slot) {
        match hour {
            Some(sample) => println!(
                "  {:>5}  {:<14} {}",
                sample.time.format("%-I %p").to_string(),
                sample.condition.label(),
                units.temperature.format(sample.temperature_c),
            ),
            None => println!("  {:>5}  -", ""),
        }
    }
}

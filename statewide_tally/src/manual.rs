/*!

This is the long-form manual for `statewide_tally` and `elexsum`.

## Input formats

The following formats are supported by `elexsum`:
* `csv` Comma Separated Values with a header row
* `xlsx` Excel workbook, the first row of the worksheet being the header

Both formats are read by column name. The required columns are `date`, `office`,
`candidate`, `party` and `votes`. Any other column (typically `county`) is ignored.

```text
date,county,office,district,party,candidate,votes
2012-11-06,Fairfax,U.S. Senate,,GOP,"Smith, Joe",350
2012-11-06,Fairfax,U.S. Senate,,Dem,"Doe, Jane",150
2012-11-06,Arlington,U.S. Rep - 1,,GOP,"Smith, Joe",250
```

## Cleaning of the rows

Before any aggregation, every row goes through the following cleaning steps:
* the candidate name is split on the comma: `Smith, Joe` has the last name `Smith`
  and the first name `Joe`. A name without a comma stops the run.
* the party is upper-cased. Labels starting with `GOP` become `REP`, labels
  starting with `DEM` become `DEM`. Everything else is kept as is (`Green` becomes `GREEN`).
* offices that mention `Rep` are House seats: the office becomes
  `U.S. House of Representatives` and the district is the number after the last
  dash (`U.S. Rep - 1` is district 1).
* the vote count must be a whole non-negative number, otherwise the run stops.

## Aggregation

Races are identified by the office label as written in the source and the district.
Within a race, candidates are identified by the party label and the name as written
in the source, so that two candidates with the same name but different parties are
kept apart.

For each race:
* the votes of each candidate are summed over all the counties;
* the candidates are ranked by votes. Candidates with the same number of votes keep
  the order in which they first appeared;
* the vote share of each candidate is its number of votes divided by the total of the race;
* if the first two candidates have the same number of votes, the race is a tie and nobody
  is marked as a winner. Otherwise, the first candidate is the winner and the margin of
  victory is the difference with the second candidate, as a share of the total;
* a race with a single candidate is won by this candidate, without any margin of victory.

A race with zero votes in total stops the run: no share can be computed for it.

All the percentages are rounded half up to the same number of decimal places
(2 by default, see [`TallyRules`](crate::TallyRules)).

## Output

The summary is a CSV file with the following columns:

```text
date,office,district,last_name,first_name,party_clean,all_votes,votes,vote_pct,winner,margin_of_vic,tie_race
```

The `winner` and `tie_race` columns contain a marker (`X` by default) when set, and are
empty otherwise.

## Configuration

`elexsum` comes with sensible defaults and all the options can be passed on the command
line. Alternatively, the options can be stored in a JSON configuration file:

```text
{
  "outputSettings": {
    "outputFile": "summary_results.csv",
    "decimalPlaces": 2,
    "markerLabel": "X"
  },
  "resultFileSources": [
    {
      "provider": "csv",
      "filePath": "fake_va_elec_results.csv",
      "url": "https://example.org/fake_va_elec_results.csv"
    }
  ]
}
```

File paths are relative to the location of the configuration file. When a `url` is
provided and the file does not exist yet, the file is first downloaded to `filePath`.
The options passed on the command line take precedence over the configuration file.

 */

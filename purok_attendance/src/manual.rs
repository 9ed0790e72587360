/*!

This is the long-form manual for `purok_attendance` and `kalihim`.

## The reporting period

A reporting period covers the two weekly sessions of a purok (an early-week session and a
late-week session). The purok is divided into groups (grupo), numbered from 1.
For every group and every session, the kalihim records:
* how many members fall under each of the reason codes `a` to `n`
* the `r107` count, which is reported next to the codes but is not part of the coded total
* how many members joined the group (`in`) and how many left it (`out`)

Before the first session, the kalihim enters the starting membership of every group. It is
usually the count computed at the end of the previous period.

## Computation

For each group and each session:

| value       | definition                                                  |
|-------------|-------------------------------------------------------------|
| totalCoded  | sum of the codes `a` to `n` (including `m`)                 |
| totalDalaw  | totalCoded + r107                                           |
| membership  | starting count + in - out for the first session, then the first session membership + in - out for the second session |
| percent     | totalCoded / membership * 100, rounded to 2 decimals        |

A starting count of zero is replaced by 1 when computing the memberships of the group.
The count carried to the next period is the starting count as entered plus all the `in`
minus all the `out` of the period.

The totals of the purok sum every counter across the groups. Their percentages are computed
in the same way, with the sum of the starting counts as entered. The overall percentage is
the mean of the two total percentages, rounded to 2 decimals.

Percentages are not clamped: inconsistent counters can lead to a percentage above 100.

## Report layout

The reference template (`SheetLayout::REFERENCE`) places:
* the groups on rows 6 to 25 (20 groups at most) and the totals on row 26
* the first session in columns `C` to `T`: codes `a` to `n`, totalCoded, percent, r107,
  totalDalaw
* the second session in columns `W` to `AN`, in the same order
* the mean percentage of each group (or the overall percentage on the totals row) in
  column `AP`
* the membership flow in columns `AR` to `AY`: starting count, first session in and out,
  first session membership (twice), second session in and out, new count. The totals row
  only has the starting count and the new count.
* the period information in the header: district name `D2`, district code `K2`, local
  name `D3`, local code `K3`, purok `Z2`, week `Z3`, month `AF3`.

The columns of code `m` always contain 0. The code is still part of totalCoded.

## Input formats (`kalihim`)

### `json`

```json
{
  "period": { "districtName": "...", "localName": "...", "purok": "3", "week": 2, "month": 5 },
  "groupValues": [
    { "group": 1,
      "firstSession": { "a": 1, "m": 2, "r107": 1, "in": 2, "out": 1 },
      "secondSession": { "b": 3, "out": 3 } }
  ],
  "sNumber": [ { "count": 10 } ]
}
```

Missing counters are 0. The `sNumber` list may be omitted when a seed store is used.
Derived fields (`totalCoded`, `totalDalaw`, `percent`) are ignored if present.

### `csv`

One header row, then one row per group with 36 columns:
`group,start`, then for the first session `a` to `n`, `r107`, `in`, `out`, then the same
17 columns for the second session.

*/
